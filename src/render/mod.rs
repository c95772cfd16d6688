// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod accumulator;
pub mod change_tracker;
pub mod frame;
pub mod image;
pub mod jitter;
