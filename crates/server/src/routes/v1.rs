// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{Router, routing::get};

use crate::{handlers::v1, state::AppState};

use super::API_VERSION;

pub fn routes() -> Router<AppState> {
    // Routes are registered with their full path rather than nested, so the
    // matched route template is the full `/v1/...` path.
    Router::new()
        .route(&format!("{API_VERSION}/users"), get(v1::get_users))
        .route(&format!("{API_VERSION}/compute"), get(v1::get_compute))
}
