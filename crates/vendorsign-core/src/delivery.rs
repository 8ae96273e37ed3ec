//! WhatsApp deep links for sharing a signed agreement.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Digits of `phone` suitable for `wa.me`: whitespace and punctuation are
/// dropped, as is a leading `+`.
#[must_use]
pub fn clean_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let without_plus = trimmed.strip_prefix('+').unwrap_or(trimmed);
    without_plus.chars().filter(char::is_ascii_digit).collect()
}

/// `https://wa.me/<digits>?text=<message>` with the message encoded once.
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        clean_phone(phone),
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

/// Greeting sent alongside the document link.
#[must_use]
pub fn whatsapp_message(vendor_name: &str, type_label: &str, document_url: &str) -> String {
    format!(
        "Hello {vendor_name}!\n\n\
         Your ZNZNOW {type_label} Vendor Agreement has been signed successfully.\n\n\
         📄 Download your signed agreement here:\n{document_url}\n\n\
         Thank you for partnering with ZNZNOW!\n\n\
         - The ZNZNOW Team"
    )
}
