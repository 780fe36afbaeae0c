// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Test Modules

mod dedup;
mod inventory;
mod sanitize;
