use super::*;

#[test]
fn mul_div255_identity_and_zero() {
    assert_eq!(mul_div255_u8(200, 255), 200);
    assert_eq!(mul_div255_u8(200, 0), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn mix_channel_endpoints() {
    assert_eq!(mix_channel(10, 200, 255), 10);
    assert_eq!(mix_channel(10, 200, 0), 200);
    assert_eq!(mix_channel(0, 255, 128), 127);
}
