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

use std::collections::BTreeMap;
use std::sync::Arc;

use hyper::header::AccessControlAllowOrigin;
use hyper::server::Listening;
use iron::mime::{Mime, SubLevel, TopLevel};
use iron::status;
use iron::{Iron, IronResult, Request, Response};
use router::Router;
use rustc_serialize::json::{Json, ToJson};

use crate::driver::{DriverError, DriverSnapshot, MesosSchedulerDriver};

/// Read-only view the web API serves. Answering `None` means "busy" and
/// must never block the driver.
pub trait StateInspector: Send + Sync {
    fn snapshot(&self) -> Option<DriverSnapshot>;
}

impl StateInspector for MesosSchedulerDriver {
    fn snapshot(&self) -> Option<DriverSnapshot> {
        MesosSchedulerDriver::snapshot(self)
    }
}

/// Serves `/admin/ping` and `/state.json` on `address` until the returned
/// handle is closed.
pub fn run_api(address: &str, inspector: Arc<dyn StateInspector>) -> Result<Listening, DriverError> {
    let mut router = Router::new();
    router.get("/admin/ping", handle_ping, "ping");
    router.get("/state.json",
               move |_r: &mut Request| handle_state(&*inspector),
               "state");

    let listening = Iron::new(router)
        .http(address)
        .map_err(|err| DriverError::Transport(format!("api on {}: {}", address, err)))?;
    info!("api listening at {}", address);
    Ok(listening)
}

fn handle_ping(_request: &mut Request) -> IronResult<Response> {
    Ok(Response::with((status::Ok, "pong")))
}

fn handle_state(inspector: &dyn StateInspector) -> IronResult<Response> {
    let snapshot = match inspector.snapshot() {
        Some(snapshot) => snapshot,
        None => return Ok(Response::with((status::ServiceUnavailable, "driver busy"))),
    };

    let content_type = Mime(TopLevel::Application, SubLevel::Json, Vec::new());
    let mut res = Response::with((content_type, status::Ok, snapshot.to_json().to_string()));
    res.headers.set(AccessControlAllowOrigin::Any);
    Ok(res)
}

impl ToJson for DriverSnapshot {
    fn to_json(&self) -> Json {
        let mut d = BTreeMap::new();
        d.insert("state".to_string(), self.state.name().to_json());
        d.insert("framework_id".to_string(), self.framework_id.to_json());
        d.insert("master".to_string(), self.master.to_json());
        d.insert("address".to_string(), self.address.to_json());
        d.insert("registered".to_string(), self.registered.to_json());
        d.insert("outstanding_offers".to_string(), self.outstanding_offers.to_json());
        d.insert("started_at".to_string(), self.started_at.to_json());
        d.insert("messages_sent".to_string(), self.messages_sent.to_json());
        d.insert("events_delivered".to_string(), self.events_delivered.to_json());
        Json::Object(d)
    }
}
