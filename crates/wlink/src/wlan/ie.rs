//! 802.11 information elements.
//!
//! Beacons and probe responses carry a sequence of `{id: u8, len: u8,
//! data[len]}` elements. The kernel hands them to us unparsed.

use winnow::binary::le_u8;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take;

use super::Ssid;

/// Element IDs we care about.
pub mod element_id {
    pub const SSID: u8 = 0;
    pub const SUPPORTED_RATES: u8 = 1;
    pub const DS_PARAMETER_SET: u8 = 3;
    pub const COUNTRY: u8 = 7;
    pub const RSN: u8 = 48;
    pub const VENDOR_SPECIFIC: u8 = 221;
}

/// One information element borrowed from its blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InformationElement<'a> {
    pub id: u8,
    pub data: &'a [u8],
}

fn element<'a>(input: &mut &'a [u8]) -> Result<InformationElement<'a>, ContextError> {
    let id = le_u8.parse_next(input)?;
    let len = le_u8.parse_next(input)?;
    let data: &[u8] = take(len as usize).parse_next(input)?;
    Ok(InformationElement { id, data })
}

/// Parse every complete element. A truncated trailing element ends parsing.
pub fn parse_ies(blob: &[u8]) -> Vec<InformationElement<'_>> {
    let mut input = blob;
    let mut elements = Vec::new();
    while !input.is_empty() {
        match element(&mut input) {
            Ok(ie) => elements.push(ie),
            Err(_) => {
                tracing::trace!(remaining = input.len(), "truncated information element");
                break;
            }
        }
    }
    elements
}

/// First element with `id`.
pub fn find_ie(blob: &[u8], id: u8) -> Option<InformationElement<'_>> {
    parse_ies(blob).into_iter().find(|ie| ie.id == id)
}

/// SSID carried in the SSID element, clipped to 32 octets.
pub fn find_ssid(blob: &[u8]) -> Option<Ssid> {
    let ie = find_ie(blob, element_id::SSID)?;
    let len = ie.data.len().min(Ssid::MAX_LEN);
    Ssid::new(&ie.data[..len]).ok()
}

/// Primary channel from the DS Parameter Set element.
pub fn find_channel(blob: &[u8]) -> Option<u8> {
    find_ie(blob, element_id::DS_PARAMETER_SET).and_then(|ie| ie.data.first().copied())
}
