//! Number formatting for prices, changes and volumes

use rust_decimal::Decimal;

/// Decimals to show for `price`: the configured count for prices of 100 and
/// above, more for smaller prices so significant digits are not lost
pub fn price_precision(price: Decimal, decimals: u32) -> u32 {
    let magnitude = price.abs();
    let minimum = if magnitude >= Decimal::ONE_HUNDRED {
        0
    } else if magnitude >= Decimal::ONE {
        4
    } else if magnitude >= Decimal::new(1, 2) {
        6
    } else {
        8
    };
    decimals.max(minimum)
}

pub fn format_price(price: Decimal, decimals: u32) -> String {
    let dp = price_precision(price, decimals) as usize;
    format!("${:.*}", dp, price)
}

/// Signed change with optional percent, e.g. `+$1000.00 (+2.04%)`
pub fn format_change(change: Decimal, percent: Option<Decimal>, decimals: u32) -> String {
    let sign = if change.is_sign_negative() && !change.is_zero() {
        "-"
    } else {
        "+"
    };
    let dp = price_precision(change, decimals) as usize;
    let mut out = format!("{}${:.*}", sign, dp, change.abs());
    if let Some(pct) = percent {
        out.push_str(&format!(" ({}{:.2}%)", sign, pct.abs()));
    }
    out
}

pub fn format_percent(pct: Decimal) -> String {
    format!("{:.2}%", pct)
}

/// Compact volume with K/M/B suffix
pub fn format_volume(volume: Decimal) -> String {
    let thousand = Decimal::from(1_000);
    let million = Decimal::from(1_000_000);
    let billion = Decimal::from(1_000_000_000);

    if volume >= billion {
        format!("{:.2}B", volume / billion)
    } else if volume >= million {
        format!("{:.2}M", volume / million)
    } else if volume >= thousand {
        format!("{:.2}K", volume / thousand)
    } else {
        format!("{:.2}", volume)
    }
}
