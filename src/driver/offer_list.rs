// The MIT License (MIT)
//
// Copyright (c) 2016 AT&T
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

use std::collections::HashSet;

use crate::proto::{OfferID, SlaveOffer, TaskDescription};

use super::error::DriverError;

/// Offers the framework has been sent and has neither replied to nor seen
/// rescinded, in the order they arrived.
#[derive(Debug, Default)]
pub struct OfferList {
    offers: Vec<(OfferID, Vec<SlaveOffer>)>,
}

impl OfferList {
    pub fn new() -> OfferList {
        OfferList { offers: Vec::new() }
    }

    fn position(&self, offer_id: &OfferID) -> Option<usize> {
        self.offers.iter().position(|&(ref id, _)| id == offer_id)
    }

    /// A repeated id replaces the earlier offer but keeps its place.
    pub fn add_offer(&mut self, offer_id: OfferID, offers: Vec<SlaveOffer>) {
        match self.position(&offer_id) {
            Some(index) => {
                warn!("offer {} was already outstanding, replacing it", offer_id);
                self.offers[index].1 = offers;
            }
            None => self.offers.push((offer_id, offers)),
        }
    }

    /// Returns whether the offer was still outstanding.
    pub fn remove_offer(&mut self, offer_id: &OfferID) -> bool {
        match self.position(offer_id) {
            Some(index) => {
                self.offers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Checks a reply against the offer without consuming it.
    pub fn validate_reply(&self, offer_id: &OfferID, tasks: &[TaskDescription]) -> Result<(), DriverError> {
        let slaves = match self.position(offer_id) {
            Some(index) => &self.offers[index].1,
            None => return Err(DriverError::UnknownOffer(offer_id.clone())),
        };

        let mut seen = HashSet::new();
        for task in tasks {
            if !seen.insert(&task.task_id) {
                return Err(DriverError::InvalidTask {
                    task_id: task.task_id.clone(),
                    reason: "duplicate task id in reply".to_string(),
                });
            }
            if !slaves.iter().any(|slave| slave.slave_id == task.slave_id) {
                return Err(DriverError::InvalidTask {
                    task_id: task.task_id.clone(),
                    reason: format!("slave {} is not part of offer {}", task.slave_id, offer_id),
                });
            }
        }

        Ok(())
    }

    pub fn offer_ids(&self) -> Vec<OfferID> {
        self.offers.iter().map(|&(ref id, _)| id.clone()).collect()
    }

    /// Forgets every outstanding offer, returning their ids.
    pub fn invalidate_all(&mut self) -> Vec<OfferID> {
        self.offers.drain(..).map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }
}
