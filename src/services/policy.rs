// Copyright 2025 Vijaykumar Singh
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Authorization policy
//!
//! Every ownership and role rule of the marketplace is decided here, in one
//! place, from the resolved caller and the capability being exercised.

use crate::core::{Booking, Result, Role, Service, UserId, VendorHiveError, VendorId};

/// Authenticated caller, resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    /// The caller's vendor profile, when they have one
    pub vendor_id: Option<VendorId>,
}

impl Actor {
    pub fn is_vendor(&self) -> bool {
        self.role == Role::Vendor
    }
}

/// What the caller is attempting
#[derive(Debug, Clone, Copy)]
pub enum Capability<'a> {
    /// Vendor-role routes that operate on the caller's own profile
    VendorAccess,

    /// A body `userId` naming who the record is for
    SubmitAs {
        user_id: Option<UserId>,
        records: &'static str,
    },

    /// Modify or remove a service listing
    ManageService {
        service: &'a Service,
        verb: &'static str,
    },

    /// Book a vendor
    BookVendor(VendorId),

    /// Review a vendor
    ReviewVendor(VendorId),

    /// Change a booking's status
    UpdateBooking(&'a Booking),
}

/// Decide whether `actor` may exercise `capability`
pub fn authorize(actor: &Actor, capability: Capability<'_>) -> Result<()> {
    match capability {
        Capability::VendorAccess => {
            if !actor.is_vendor() {
                return Err(VendorHiveError::forbidden("Vendor access required"));
            }
            if actor.vendor_id.is_none() {
                return Err(VendorHiveError::not_found("Vendor profile", actor.user_id));
            }
            Ok(())
        }

        Capability::SubmitAs { user_id, records } => match user_id {
            Some(id) if id != actor.user_id => Err(VendorHiveError::forbidden(format!(
                "You can only create {} for yourself",
                records
            ))),
            _ => Ok(()),
        },

        Capability::ManageService { service, verb } => {
            authorize(actor, Capability::VendorAccess)?;
            if actor.vendor_id != Some(service.vendor_id) {
                return Err(VendorHiveError::forbidden(format!(
                    "You can only {} your own services",
                    verb
                )));
            }
            Ok(())
        }

        Capability::BookVendor(vendor_id) => {
            if actor.vendor_id == Some(vendor_id) {
                return Err(VendorHiveError::forbidden("You cannot book your own business"));
            }
            Ok(())
        }

        Capability::ReviewVendor(vendor_id) => {
            if actor.vendor_id == Some(vendor_id) {
                return Err(VendorHiveError::forbidden("You cannot review your own business"));
            }
            Ok(())
        }

        Capability::UpdateBooking(booking) => {
            let is_customer = booking.user_id == actor.user_id;
            let is_vendor = actor.vendor_id == Some(booking.vendor_id);
            if !is_customer && !is_vendor {
                return Err(VendorHiveError::forbidden(
                    "You can only update bookings you are part of",
                ));
            }
            Ok(())
        }
    }
}
