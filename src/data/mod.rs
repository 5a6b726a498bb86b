//! Core data models for Teamdeck
//!
//! This module contains the data types used throughout the application for
//! representing team members and the records nested inside a member profile.

pub mod members;

#[allow(unused_imports)]
pub use members::{DirectoryClient, DirectoryError};

use serde::{Deserialize, Serialize};

/// Geographic coordinates attached to a member's address
///
/// The directory API serves coordinates as strings, and they are carried
/// through unparsed; nothing in the application does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    /// Latitude
    pub lat: String,
    /// Longitude
    pub lng: String,
}

/// Postal address of a team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street name
    pub street: String,
    /// Suite or apartment
    pub suite: String,
    /// City
    pub city: String,
    /// Postal code
    pub zipcode: String,
    /// Coordinates
    pub geo: Geo,
}

/// Company a team member works for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company name
    pub name: String,
    /// Company slogan
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    /// Line of business
    pub bs: String,
}

/// A single member of the team directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier assigned by the directory
    pub id: u64,
    /// Full name
    pub name: String,
    /// Short handle
    pub username: String,
    /// Email address
    pub email: String,
    /// Postal address
    pub address: Address,
    /// Phone number
    pub phone: String,
    /// Personal website
    pub website: String,
    /// Employer
    pub company: Company,
}

impl Member {
    /// One-line location summary used by the list view ("city, street")
    pub fn short_address(&self) -> String {
        format!("{}, {}", self.address.city, self.address.street)
    }
}
