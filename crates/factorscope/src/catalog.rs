//! Display names for groups, factors, rank columns and return types.
//!
//! Identifiers missing from the tables fall back to the raw identifier, so
//! new data files are usable before they are catalogued.

/// Factor group display names.
pub const GROUP_NAMES: &[(&str, &str)] = &[
    ("momentum", "Momentum"),
    ("value", "Value-versus-Growth"),
    ("investment", "Investment"),
    ("profitability", "Profitability"),
    ("intangibles", "Intangibles"),
    ("frictions", "Frictions"),
];

/// Factor display names, keyed by factor id.
pub const FACTOR_NAMES: &[(&str, &str)] = &[
    // Momentum
    ("abr_1", "Abnormal Earnings Returns (1m)"),
    ("abr_6", "Abnormal Earnings Returns (6m)"),
    ("abr_12", "Abnormal Earnings Returns (12m)"),
    ("cim_1", "Customer Industries Momentum (1m)"),
    ("cim_6", "Customer Industries Momentum (6m)"),
    ("cim_12", "Customer Industries Momentum (12m)"),
    ("cm_1", "Customer Momentum (1m)"),
    ("cm_6", "Customer Momentum (6m)"),
    ("cm_12", "Customer Momentum (12m)"),
    ("def_1", "Changes in Analyst Forecasts (1m)"),
    ("def_6", "Changes in Analyst Forecasts (6m)"),
    ("def_12", "Changes in Analyst Forecasts (12m)"),
    ("ile_1", "Industry Lead-Lag Earnings (1m)"),
    ("ilr_1", "Industry Lead-Lag Returns (1m)"),
    ("ilr_6", "Industry Lead-Lag Returns (6m)"),
    ("ilr_12", "Industry Lead-Lag Returns (12m)"),
    ("im_1", "Industry Momentum (1m)"),
    ("im_6", "Industry Momentum (6m)"),
    ("im_12", "Industry Momentum (12m)"),
    ("nei_1", "Consecutive Earnings Increase (1m)"),
    ("p52w_6", "52-Week High (6m)"),
    ("p52w_12", "52-Week High (12m)"),
    ("r6_1", "6-Month Prior Returns (1m)"),
    ("r6_6", "6-Month Prior Returns (6m)"),
    ("r6_12", "6-Month Prior Returns (12m)"),
    ("r11_1", "11-Month Prior Returns (1m)"),
    ("r11_6", "11-Month Prior Returns (6m)"),
    ("r11_12", "11-Month Prior Returns (12m)"),
    ("re_1", "Analyst Earnings Forecast Revisions (1m)"),
    ("re_6", "Analyst Earnings Forecast Revisions (6m)"),
    ("resid6_6", "6-Month Residual Momentum (6m)"),
    ("resid6_12", "6-Month Residual Momentum (12m)"),
    ("resid11_1", "11-Month Residual Momentum (1m)"),
    ("resid11_6", "11-Month Residual Momentum (6m)"),
    ("resid11_12", "11-Month Residual Momentum (12m)"),
    ("rs_1", "Revenue Surprises (1m)"),
    ("sim_1", "Supplier Industries Momentum (1m)"),
    ("sim_12", "Supplier Industries Momentum (12m)"),
    ("sm_1", "Segment Momentum (1m)"),
    ("sm_12", "Segment Momentum (12m)"),
    ("sue_1", "Standard Unexpected Earnings (1m)"),
    ("sue_6", "Standard Unexpected Earnings (6m)"),

    // Value-versus-growth
    ("bm", "Book-to-Market Equity"),
    ("bmj", "Book-to-June-Market Equity"),
    ("bmq_12", "Quarterly Book-to-Market (12m)"),
    ("cp", "Cash Flow-to-Price"),
    ("cpq_1", "Quarterly Cash Flow-to-Price (1m)"),
    ("cpq_6", "Quarterly Cash Flow-to-Price (6m)"),
    ("cpq_12", "Quarterly Cash Flow-to-Price (12m)"),
    ("dp", "Dividend Yield"),
    ("dur", "Equity Duration"),
    ("ebp", "Enterprise Book-to-Price"),
    ("em", "Enterprise Multiple"),
    ("emq_1", "Quarterly Enterprise Multiple (1m)"),
    ("emq_6", "Quarterly Enterprise Multiple (6m)"),
    ("emq_12", "Quarterly Enterprise Multiple (12m)"),
    ("ep", "Earnings-to-Price"),
    ("epq_1", "Quarterly Earnings-to-Price (1m)"),
    ("epq_6", "Quarterly Earnings-to-Price (6m)"),
    ("epq_12", "Quarterly Earnings-to-Price (12m)"),
    ("ir", "Intangible Return"),
    ("nop", "Net Payout Yield"),
    ("ocp", "Operating Cash Flow-to-Price"),
    ("ocpq_1", "Quarterly Operating Cash Flow-to-Price (1m)"),
    ("op", "Payout Yield"),
    ("rev_1", "Long-term Reversal (1m)"),
    ("rev_6", "Long-term Reversal (6m)"),
    ("rev_12", "Long-term Reversal (12m)"),
    ("sp", "Sales-to-Price"),
    ("spq_1", "Quarterly Sales-to-Price (1m)"),
    ("spq_6", "Quarterly Sales-to-Price (6m)"),
    ("spq_12", "Quarterly Sales-to-Price (12m)"),
    ("vfp", "Analyst-based Intrinsic Value-to-Market"),
    ("vhp", "ROE-based Intrinsic Value-to-Market"),

    // Investment
    ("aci", "Abnormal Corporate Investment"),
    ("cei", "Composite Equity Issuance"),
    ("dac", "Discretionary Accruals"),
    ("dbe", "Changes in Book Equity"),
    ("dcoa", "Changes in Current Operating Assets"),
    ("dfin", "Changes in Net Financial Assets"),
    ("dfnl", "Changes in Financial Liabilities"),
    ("dii", "Changes in Investment vs Industry"),
    ("dlno", "Changes in Long-term Net Operating Assets"),
    ("dlti", "Changes in Long-term Investments"),
    ("dnca", "Changes in Non-current Operating Assets"),
    ("dnco", "Changes in Net Non-current Operating Assets"),
    ("dnoa", "Changes in Net Operating Assets"),
    ("dpia", "Changes in PPE and Inventory to Assets"),
    ("dwc", "Changes in Net Non-cash Working Capital"),
    ("ia", "Investment-to-Assets"),
    ("iaq_1", "Quarterly Investment-to-Assets (1m)"),
    ("iaq_6", "Quarterly Investment-to-Assets (6m)"),
    ("iaq_12", "Quarterly Investment-to-Assets (12m)"),
    ("ig", "Investment Growth"),
    ("ig2", "2-Year Investment Growth"),
    ("ivc", "Inventory Changes"),
    ("ivg", "Inventory Growth"),
    ("ndf", "Net External Debt Financing"),
    ("nxf", "Net External Equity Financing"),
    ("noa", "Net Operating Assets"),
    ("nsi", "Net Stock Issues"),
    ("oa", "Operating Accruals"),
    ("pda", "Percent Discretionary Accruals"),
    ("poa", "Percent Operating Accruals"),
    ("pta", "Percent Total Accruals"),
    ("ta", "Total Accruals"),

    // Profitability
    ("ato", "Asset Turnover"),
    ("atoq_1", "Quarterly Asset Turnover (1m)"),
    ("atoq_6", "Quarterly Asset Turnover (6m)"),
    ("atoq_12", "Quarterly Asset Turnover (12m)"),
    ("cla", "Cash Operating Profits-to-Assets"),
    ("claq_1", "Quarterly Cash Operating Profits (1m)"),
    ("claq_6", "Quarterly Cash Operating Profits (6m)"),
    ("claq_12", "Quarterly Cash Operating Profits (12m)"),
    ("cop", "Operating Cash Flow-to-Assets"),
    ("cto", "Capital Turnover"),
    ("ctoq_1", "Quarterly Capital Turnover (1m)"),
    ("ctoq_6", "Quarterly Capital Turnover (6m)"),
    ("ctoq_12", "Quarterly Capital Turnover (12m)"),
    ("droa_1", "Change in Return on Assets (1m)"),
    ("droa_6", "Change in Return on Assets (6m)"),
    ("droe_1", "Change in Return on Equity (1m)"),
    ("droe_6", "Change in Return on Equity (6m)"),
    ("droe_12", "Change in Return on Equity (12m)"),
    ("eg_1", "Expected Growth (1m)"),
    ("eg_6", "Expected Growth (6m)"),
    ("eg_12", "Expected Growth (12m)"),
    ("fp_6", "Failure Probability (6m)"),
    ("fq_1", "Quarterly Fundamental Score (1m)"),
    ("fq_6", "Quarterly Fundamental Score (6m)"),
    ("fq_12", "Quarterly Fundamental Score (12m)"),
    ("glaq_1", "Quarterly Gross Profits-to-Assets (1m)"),
    ("glaq_6", "Quarterly Gross Profits-to-Assets (6m)"),
    ("glaq_12", "Quarterly Gross Profits-to-Assets (12m)"),
    ("gpa", "Gross Profits-to-Assets"),
    ("olaq_1", "Quarterly Operating Profits-to-Assets (1m)"),
    ("olaq_6", "Quarterly Operating Profits-to-Assets (6m)"),
    ("olaq_12", "Quarterly Operating Profits-to-Assets (12m)"),
    ("oleq_1", "Quarterly Operating Profits-to-Equity (1m)"),
    ("oleq_6", "Quarterly Operating Profits-to-Equity (6m)"),
    ("opa", "Operating Profits-to-Assets"),
    ("ope", "Operating Profits-to-Equity"),
    ("oq_1", "Quarterly O-Score (1m)"),
    ("pmq_1", "Quarterly Profit Margin (1m)"),
    ("rnaq_1", "Quarterly Return on Net Operating Assets (1m)"),
    ("rnaq_6", "Quarterly Return on Net Operating Assets (6m)"),
    ("rnaq_12", "Quarterly Return on Net Operating Assets (12m)"),
    ("roa_1", "Return on Assets (1m)"),
    ("roa_6", "Return on Assets (6m)"),
    ("roe_1", "Return on Equity (1m)"),
    ("roe_6", "Return on Equity (6m)"),
    ("sgq_1", "Quarterly Sales Growth (1m)"),
    ("tbiq_6", "Quarterly Tax-to-Book Income (6m)"),
    ("tbiq_12", "Quarterly Tax-to-Book Income (12m)"),

    // Intangibles
    ("adm", "Advertising-to-Market"),
    ("almq_1", "Quarterly Asset Liquidity (1m)"),
    ("almq_6", "Quarterly Asset Liquidity (6m)"),
    ("almq_12", "Quarterly Asset Liquidity (12m)"),
    ("eprd", "Earnings Predictability"),
    ("dls_1", "Long-Short Earnings Growth Forecast Disparity (1m)"),
    ("etl", "Earnings Timeliness"),
    ("etr", "Effective Tax Rate"),
    ("hs", "Industry Sales Concentration"),
    ("ioca", "Industry-Adjusted Organizational Capital-to-Assets"),
    ("oca", "Organizational Capital-to-Assets"),
    ("ol", "Operating Leverage"),
    ("olq_1", "Quarterly Operating Leverage (1m)"),
    ("olq_6", "Quarterly Operating Leverage (6m)"),
    ("olq_12", "Quarterly Operating Leverage (12m)"),
    ("r1a", "Seasonality Month t-12"),
    ("r1n", "Seasonality Months t-11 to t-1"),
    ("r5a", "Seasonality Months t-24,36,48,60"),
    ("r5n", "Seasonality Months t-60 to t-13 (Excl. Special)"),
    ("r10a", "Seasonality Months t-72,84,96,108,120"),
    ("r10n", "Seasonality Months t-120 to t-61 (Excl. Special)"),
    ("r15a", "Seasonality Months t-132,144,156,168,180"),
    ("r20a", "Seasonality Months t-192,204,216,228,240"),
    ("rca", "R&D Capital-to-Assets"),
    ("rdm", "R&D Expense-to-Market"),
    ("rdmq_1", "Quarterly R&D Expense-to-Market (1m)"),
    ("rdmq_6", "Quarterly R&D Expense-to-Market (6m)"),
    ("rdmq_12", "Quarterly R&D Expense-to-Market (12m)"),
    ("rdsq_6", "Quarterly R&D Expense-to-Sales (6m)"),
    ("rdsq_12", "Quarterly R&D Expense-to-Sales (12m)"),
    ("rer", "Industry-Adjusted Real Estate Ratio"),

    // Frictions
    ("beta_1", "Market Beta (1m)"),
    ("dtv_12", "Dollar Trading Volume (12m)"),
    ("isff_1", "FF3 Idiosyncratic Skewness (1m)"),
    ("isq_1", "Q-Factor Idiosyncratic Skewness (1m)"),
    ("ivff_1", "FF3 Idiosyncratic Volatility (1m)"),
    ("ivq_1", "Q-Factor Idiosyncratic Volatility (1m)"),
    ("me", "Market Equity"),
    ("srev", "Short-term Reversal"),
    ("sv_1", "Systematic Volatility (1m)"),
    ("tv_1", "Total Volatility (1m)"),
];

/// Rank column display names.
pub const RANK_NAMES: &[(&str, &str)] = &[
    ("rank_ME", "Market Cap"),
    ("rank_beta", "Beta"),
    ("rank_mom", "Momentum"),
    ("rank_bm", "Book-to-Market"),
    ("rank_op", "Operating Profitability"),
    ("rank_inv", "Investment"),
];

/// Prefix of factor ids that were sorted within market-cap buckets.
const MARKET_CAP_PREFIX: &str = "me_";

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Display name of a group, or the group id itself.
pub fn group_name(group: &str) -> &str {
    lookup(GROUP_NAMES, group).unwrap_or(group)
}

/// Display name of a factor, ignoring a `me_` prefix.
pub fn factor_name(factor: &str) -> &str {
    let base = factor.strip_prefix(MARKET_CAP_PREFIX).unwrap_or(factor);
    lookup(FACTOR_NAMES, base).unwrap_or(base)
}

/// Display name of a `group/factor` id, e.g. `Value-versus-Growth: Dividend Yield`.
///
/// A bare factor id yields just the factor name.
pub fn display_name(id: &str) -> String {
    match id.split_once('/') {
        Some((group, factor)) => format!("{}: {}", group_name(group), factor_name(factor)),
        None => factor_name(id).to_string(),
    }
}

/// Display name of a rank column.
///
/// Unknown columns drop the `rank_` prefix and are title-cased, so
/// `rank_gross_prof` becomes `Gross Prof`.
pub fn rank_name(column: &str) -> String {
    if let Some(name) = lookup(RANK_NAMES, column) {
        return name.to_string();
    }
    column
        .strip_prefix("rank_")
        .unwrap_or(column)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name of a return column.
pub fn return_type_name(column: &str) -> &str {
    match column {
        "ret_vw" => "Value-weighted",
        "ret_ew" => "Equal-weighted",
        other => other,
    }
}
