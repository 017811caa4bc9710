use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use rand::RngCore;

fn main() {
    let mut key = [0u8; 64];
    rand::rng().fill_bytes(&mut key);
    let encoded_key = STANDARD_NO_PAD.encode(key);
    println!("ARSIP_SECRET_KEY={encoded_key}");
}
