use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy listing sites we know how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    Proxy360,
    Proxyru,
    Kuai,
    Xici,
}

/// Where the candidate rows of a page live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    /// Rows inside the `index`-th (zero based, document order) element matching `container`.
    NthContainer {
        container: &'static str,
        index: usize,
        rows: &'static str,
    },
    /// Every element matching the selector is a row.
    Rows(&'static str),
}

/// Per-site extraction table: which rows count, how many cells a row needs,
/// and which cells hold the host and the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteProfile {
    pub site: SiteId,
    pub scope: RowScope,
    pub cell_selector: &'static str,
    pub skip_header: bool,
    pub min_cells: usize,
    pub host_index: usize,
    pub port_index: usize,
}

static PROFILES: [SiteProfile; 4] = [
    SiteProfile {
        site: SiteId::Proxy360,
        scope: RowScope::Rows("div.proxylistitem"),
        cell_selector: "span",
        skip_header: false,
        min_cells: 2,
        host_index: 0,
        port_index: 1,
    },
    SiteProfile {
        site: SiteId::Proxyru,
        scope: RowScope::NthContainer {
            container: "table",
            index: 7,
            rows: "tr",
        },
        cell_selector: "td",
        skip_header: true,
        min_cells: 3,
        host_index: 1,
        port_index: 2,
    },
    SiteProfile {
        site: SiteId::Kuai,
        scope: RowScope::Rows("div#index_free_list table tr"),
        cell_selector: "td",
        skip_header: true,
        min_cells: 2,
        host_index: 0,
        port_index: 1,
    },
    SiteProfile {
        site: SiteId::Xici,
        scope: RowScope::Rows("table#ip_list tr"),
        cell_selector: "td",
        skip_header: true,
        min_cells: 3,
        host_index: 1,
        port_index: 2,
    },
];

impl SiteId {
    /// All sites, in job construction order.
    pub fn all() -> &'static [SiteId] {
        &[SiteId::Proxy360, SiteId::Proxyru, SiteId::Kuai, SiteId::Xici]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteId::Proxy360 => "proxy360",
            SiteId::Proxyru => "proxyru",
            SiteId::Kuai => "kuai",
            SiteId::Xici => "xici",
        }
    }

    /// Hostname shown in `[system] accessing ...` lines.
    pub fn hostname(&self) -> &'static str {
        match self {
            SiteId::Proxy360 => "www.proxy360.cn",
            SiteId::Proxyru => "proxy.com.ru",
            SiteId::Kuai => "www.kuaidaili.com",
            SiteId::Xici => "www.xicidaili.com",
        }
    }

    pub fn profile(&self) -> &'static SiteProfile {
        match self {
            SiteId::Proxy360 => &PROFILES[0],
            SiteId::Proxyru => &PROFILES[1],
            SiteId::Kuai => &PROFILES[2],
            SiteId::Xici => &PROFILES[3],
        }
    }

    /// Listing URL for one page. `category` only matters for xici.
    pub fn page_url(&self, page: u32, category: &str) -> String {
        match self {
            SiteId::Proxy360 => "http://www.proxy360.cn".to_string(),
            SiteId::Proxyru => format!("http://proxy.com.ru/list_{}.html", page),
            SiteId::Kuai => format!("http://www.kuaidaili.com/proxylist/{}/", page),
            SiteId::Xici => format!("http://www.xicidaili.com/{}/{}", category, page),
        }
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
