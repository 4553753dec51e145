// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteScheme {
    Frost,
    Ember,
    Aurora,
    Candy,
    Mono,
}

pub const CELL_PX_W: f32 = 8.0;
pub const CELL_PX_H: f32 = 16.0;
