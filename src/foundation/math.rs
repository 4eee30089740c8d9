pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Blend two channel values: `fg * ratio + bg * (255 - ratio)`, rounded.
pub(crate) fn mix_channel(fg: u8, bg: u8, ratio: u8) -> u8 {
    let r = u32::from(ratio);
    ((u32::from(fg) * r + u32::from(bg) * (255 - r) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
