mod get_compute;
mod get_users;

pub use get_compute::{
    ComputeQueryParams, ComputeResponse, DEFAULT_N, MAX_N, get_compute, resolve_n, sum_squares,
};
pub use get_users::{UsersResponse, get_users};
