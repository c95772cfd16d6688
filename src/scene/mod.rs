// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod light;
pub mod loader;
pub mod material;
pub mod object;
pub mod primitive;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod transform;
