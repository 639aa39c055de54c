//! 游戏行业公司种子数据

use serde::Serialize;

/// 公司类别
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CompanyCategory {
    Publisher,
    Platform,
    Holding,
    #[serde(rename = "Indie-public")]
    IndiePublic,
    #[serde(rename = "Esports-related")]
    EsportsRelated,
}

/// 被跟踪的公司
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Company {
    pub ticker: &'static str,
    pub name: &'static str,
    pub category: CompanyCategory,
}

const fn company(ticker: &'static str, name: &'static str, category: CompanyCategory) -> Company {
    Company {
        ticker,
        name,
        category,
    }
}

use CompanyCategory::*;

/// 默认跟踪的公司列表，同时作为轮询器的默认 watchlist
pub const SEED_COMPANIES: &[Company] = &[
    company("NTDOY", "Nintendo", Platform),
    company("SONY", "Sony Group", Platform),
    company("MSFT", "Microsoft", Platform),
    company("NVDA", "NVIDIA", Platform),
    company("AMD", "Advanced Micro Devices", Platform),
    company("RBLX", "Roblox", Platform),
    company("U", "Unity Software", Platform),
    company("EA", "Electronic Arts", Publisher),
    company("TTWO", "Take-Two Interactive", Publisher),
    company("NTES", "NetEase", Publisher),
    company("UBI.PA", "Ubisoft", Publisher),
    company("CDR.WA", "CD Projekt", Publisher),
    company("SQNXF", "Square Enix", Publisher),
    company("CCOEY", "Capcom", Publisher),
    company("KNMCY", "Konami", Publisher),
    company("NCBDY", "Bandai Namco", Publisher),
    company("SGAMY", "Sega Sammy", Publisher),
    company("NEXOY", "Nexon", Publisher),
    company("PLTK", "Playtika", Publisher),
    company("GRVY", "Gravity", Publisher),
    company("DDI", "DoubleDown Interactive", Publisher),
    company("TCEHY", "Tencent", Holding),
    company("EMBRAC-B.ST", "Embracer Group", Holding),
    company("SE", "Sea Limited", Holding),
    company("GME", "GameStop", Holding),
    company("PDX.ST", "Paradox Interactive", IndiePublic),
    company("REMEDY.HE", "Remedy Entertainment", IndiePublic),
    company("FDEV.L", "Frontier Developments", IndiePublic),
    company("TBLD.L", "tinyBuild", IndiePublic),
    company("SKLZ", "Skillz", EsportsRelated),
    company("CRSR", "Corsair Gaming", EsportsRelated),
    company("LOGI", "Logitech", EsportsRelated),
    company("ESPO", "VanEck Video Gaming and eSports ETF", EsportsRelated),
    company("HERO", "Global X Video Games & Esports ETF", EsportsRelated),
];

/// 按 ticker 查找公司
pub fn find_company(ticker: &str) -> Option<&'static Company> {
    SEED_COMPANIES.iter().find(|c| c.ticker == ticker)
}

/// 默认 watchlist
pub fn seed_tickers() -> Vec<String> {
    SEED_COMPANIES.iter().map(|c| c.ticker.to_string()).collect()
}
