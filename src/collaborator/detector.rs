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

use crate::driver::DriverError;

use super::{MasterDetector, MasterListener};

#[derive(Clone, Debug, PartialEq)]
pub enum MasterUrl {
    /// In-process simulated cluster.
    Local,
    /// A single master process, as `master@host:port`.
    Static(String),
    ZooKeeper(String),
}

pub fn parse_master_url(url: &str) -> Result<MasterUrl, DriverError> {
    let url = url.trim();
    if url == "local" {
        return Ok(MasterUrl::Local);
    }
    if url.starts_with("zoo://") {
        return Ok(MasterUrl::ZooKeeper(url["zoo://".len()..].to_string()));
    }

    let rest = if url.starts_with("mesos://") {
        &url["mesos://".len()..]
    } else {
        url
    };
    let (id, host_port) = match rest.find('@') {
        Some(at) => (&rest[..at], &rest[at + 1..]),
        None => ("master", rest),
    };

    let mut parts = host_port.rsplitn(2, ':');
    let port = parts.next().unwrap_or("");
    let host = parts.next().unwrap_or("");
    if id.is_empty() || host.is_empty() || port.parse::<u16>().is_err() {
        return Err(DriverError::Config(format!("cannot parse master URL '{}'", url)));
    }

    Ok(MasterUrl::Static(format!("{}@{}:{}", id, host, port)))
}

/// Detector for a fixed master: announces it once to every subscriber.
pub struct StaticDetector {
    address: String,
}

impl StaticDetector {
    pub fn new(address: &str) -> StaticDetector {
        StaticDetector { address: address.to_string() }
    }
}

impl MasterDetector for StaticDetector {
    fn subscribe(&self, listener: MasterListener) -> Result<(), DriverError> {
        if !listener.new_master(&self.address) {
            warn!("master listener for {} went away before subscribing", self.address);
        }
        Ok(())
    }
}
