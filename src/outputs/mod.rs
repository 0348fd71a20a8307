//! Output formats for the article list.
//!
//! - [`table`]: the CSV table, both the run's artifact and the input of later runs
//! - [`html`]: the HTML rendering of that table used as the email body

pub mod html;
pub mod table;
