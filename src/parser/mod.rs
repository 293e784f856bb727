//! Input parsing: book URLs and their query parameters.
//!
//! # Example
//!
//! ```
//! use gbooks_dl_core::parser::{parse_book_url, required_query_param};
//!
//! let url = parse_book_url("https://books.google.com/books?id=abc123&pg=PA1").unwrap();
//! assert_eq!(required_query_param(&url, "id").unwrap(), "abc123");
//! ```

mod error;
mod url;

pub use error::{MAX_URL_LENGTH, ParseError};
pub use url::{match_host_label, parse_book_url, required_query_param};
