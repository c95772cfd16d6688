// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(dead_code)]

mod app;
mod camera;
mod constants;
mod error;
mod gpu;
mod io;
mod render;
mod scene;
mod shaders;

use std::env;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();
    app::run(env::args().nth(1), env::args().nth(2))
}
