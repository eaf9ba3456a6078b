mod add;
mod boq;
mod clients;
mod export;
mod get;
mod health_check;
mod update;
mod workflow;

pub use add::add;
pub use boq::{boq_daily, boq_monthly};
pub use clients::{add_client, get_clients};
pub use export::export_shifts_csv;
pub use get::{Filters, Operator, SortField, SortOption, get_approvals, get_shift, query_shifts};
pub use health_check::health_check;
pub use update::update;
pub use workflow::{approve, reject, submit};
