/*
 * This file is part of drvkit.
 *
 * Copyright (C) 2025 drvkit contributors
 *
 * drvkit is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * drvkit is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with drvkit. If not, see <https://www.gnu.org/licenses/>.
 */

//! drvkit command line front end
//!
//! The matching logic lives in `dk-core` and the OS adapters in `dk-host`;
//! this crate wires them to a CLI, run logging and the console chooser.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod prompt;
