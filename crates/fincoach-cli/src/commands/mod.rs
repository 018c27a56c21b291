//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Spending analysis (patterns, recommendations, budget summary)
//! - `core` - Init and shared utilities (open_db, load_config, parse_date)
//! - `goals` - Savings goal commands (add, list, contribute, delete)
//! - `profile` - Profile commands (create, show, list, set-income, set-risk)
//! - `simulate` - Simulations and saved runs (list, show, rerun)
//! - `terms` - Knowledge base lookups and questions
//! - `transactions` - Transaction commands (add, list, import)

pub mod analyze;
pub mod core;
pub mod goals;
pub mod profile;
pub mod simulate;
pub mod terms;
pub mod transactions;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use goals::*;
pub use profile::*;
pub use simulate::*;
pub use terms::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Colored money amount: red for money out, green for money in
pub fn format_amount(amount: rust_decimal::Decimal) -> String {
    if amount.is_sign_negative() {
        format!("\x1b[31m-${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}
