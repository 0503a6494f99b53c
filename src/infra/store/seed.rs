//! Demo records loaded when the service starts.

use crate::domain::{ItemRequest, NewItem, ValidationError};

const SEED_ITEMS: [(&str, &str, f64, i64); 5] = [
    (
        "Wireless Mouse",
        "Ergonomic wireless mouse with adjustable DPI",
        29.99,
        150,
    ),
    (
        "Mechanical Keyboard",
        "RGB mechanical keyboard with Cherry MX switches",
        149.99,
        75,
    ),
    (
        "USB-C Hub",
        "7-in-1 USB-C hub with HDMI, USB 3.0, and SD card reader",
        49.99,
        200,
    ),
    (
        "Monitor Stand",
        "Adjustable monitor stand with cable management",
        79.99,
        50,
    ),
    (
        "Webcam HD",
        "1080p HD webcam with built-in microphone",
        89.99,
        120,
    ),
];

/// The five seed records, in the order they receive ids 1 through 5.
///
/// Seeds go through the same validation as client input.
pub fn seed_items() -> Result<Vec<NewItem>, ValidationError> {
    SEED_ITEMS
        .iter()
        .map(|&(name, description, price, quantity)| {
            NewItem::try_from(ItemRequest::new(name, price, quantity).with_description(description))
        })
        .collect()
}
