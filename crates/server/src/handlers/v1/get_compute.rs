// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{Json, extract::Query};
use serde::{Deserialize, Serialize};

pub const DEFAULT_N: u64 = 10_000;
pub const MAX_N: u64 = 200_000;

/// `n` is taken as a raw string so malformed values fall back to the default
/// instead of being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ComputeQueryParams {
    #[serde(default)]
    pub n: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub n: u64,
    pub sum_squares: u64,
}

/// Missing, unparsable or non-positive input becomes [`DEFAULT_N`]; anything
/// above [`MAX_N`] is clamped.
pub fn resolve_n(raw: Option<&str>) -> u64 {
    let n = raw
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n as u64)
        .unwrap_or(DEFAULT_N);

    n.min(MAX_N)
}

/// Σ i² for i in 1..=n
pub fn sum_squares(n: u64) -> u64 {
    (1..=n).map(|i| i * i).sum()
}

pub async fn get_compute(Query(params): Query<ComputeQueryParams>) -> Json<ComputeResponse> {
    let n = resolve_n(params.n.as_deref());

    Json(ComputeResponse {
        n,
        sum_squares: sum_squares(n),
    })
}
