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

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_DRIVER_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    // Drivers whose callbacks are on this thread's stack right now.
    static DISPATCHING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

pub fn next_driver_id() -> usize {
    NEXT_DRIVER_ID.fetch_add(1, Ordering::Relaxed)
}

/// True when the calling thread is inside a callback of `driver_id`, so the
/// driver's exclusive region is already held further up the stack.
pub fn in_callback(driver_id: usize) -> bool {
    DISPATCHING.with(|dispatching| dispatching.borrow().contains(&driver_id))
}

/// Marks the current thread as running a callback of one driver until
/// dropped, including when the callback panics.
pub struct CallbackScope {
    driver_id: usize,
}

impl CallbackScope {
    pub fn enter(driver_id: usize) -> CallbackScope {
        DISPATCHING.with(|dispatching| dispatching.borrow_mut().push(driver_id));
        CallbackScope { driver_id: driver_id }
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        DISPATCHING.with(|dispatching| {
            let mut dispatching = dispatching.borrow_mut();
            if let Some(position) = dispatching.iter().rposition(|&id| id == self.driver_id) {
                dispatching.remove(position);
            }
        });
    }
}
