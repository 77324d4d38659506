//! Month/year range generation for the scrape pipeline.
//!
//! Pure functions only — the caller supplies "now", which keeps the range
//! deterministic under test and pins the testable property: start year 2010
//! observed in March 2019 yields exactly 9 × 12 + 3 = 111 months.

/// Month labels as the legacy site's calendar widget spells them
/// (Portuguese three-letter abbreviations).
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// One calendar month. `month` is 1-based (1–12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthYear {
    pub month: u32,
    pub year: i32,
}

impl MonthYear {
    /// The site's label for this month.
    ///
    /// `MonthYear` is constructible directly (and reachable through
    /// [`crate::Scraper::run_units`]), so an out-of-range `month` clamps
    /// into 1–12 here rather than panicking.
    pub fn label(&self) -> &'static str {
        MONTH_LABELS[(self.month.clamp(1, 12) - 1) as usize]
    }
}

impl std::fmt::Display for MonthYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// All months from January of `start_year` through `stop_month` of
/// `stop_year`, inclusive, in ascending order.
///
/// Full years run Jan–Dec; the final year is truncated at `stop_month`.
/// Returns an empty range when `stop_year < start_year`.
pub fn month_span(start_year: i32, stop_month: u32, stop_year: i32) -> Vec<MonthYear> {
    if stop_year < start_year {
        return Vec::new();
    }

    let mut span = Vec::with_capacity(((stop_year - start_year) * 12) as usize + 12);
    for year in start_year..stop_year {
        for month in 1..=12 {
            span.push(MonthYear { month, year });
        }
    }
    for month in 1..=stop_month.min(12) {
        span.push(MonthYear {
            month,
            year: stop_year,
        });
    }
    span
}
