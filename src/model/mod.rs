//! Types that represent the core data model, such as `Record` and `CategoryRegistry`.
mod amount;
mod category;
mod record;

pub use amount::{Amount, AmountError};
pub use category::CategoryRegistry;
pub use record::{parse_date, MatchFields, Record, RecordId, RecordKind, DATE_FORMAT};
