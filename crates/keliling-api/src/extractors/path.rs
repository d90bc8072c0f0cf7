//! Typed path parameter helpers.

use keliling_core::error::AppError;
use keliling_core::types::VendorId;

/// Parses a vendor ID from a path segment.
///
/// An ID that cannot exist is reported the same way as one that does not.
pub fn parse_vendor_id(s: &str) -> Result<VendorId, AppError> {
    s.parse()
        .map_err(|_| AppError::not_found("Vendor not found"))
}
