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

use std::sync::Arc;

use crate::api::{run_api, StateInspector};
use crate::driver::{DriverError, DriverState, MesosSchedulerDriver, SchedulerDriver};
use crate::scheduler::TaskRunnerScheduler;
use crate::utils::Params;

const TASK_CPUS: f64 = 1.0;
const TASK_MEM: f64 = 128.0;

/// Runs `tasks` tasks through a driver built from `params` and blocks until
/// the driver stops or aborts. Serves the web view while running when
/// `webui_port` is configured.
pub fn run_scheduler(params: Params, tasks: usize) -> Result<DriverState, DriverError> {
    let serve_api = params.contains("webui_port");
    let port = params.get_int("webui_port", 8081)?;

    let scheduler = TaskRunnerScheduler::new(tasks, TASK_CPUS, TASK_MEM);
    let driver = Arc::new(MesosSchedulerDriver::new(Box::new(scheduler), params, None)?);

    let mut listening = if serve_api {
        let inspector: Arc<dyn StateInspector> = driver.clone();
        Some(run_api(&format!("0.0.0.0:{}", port), inspector)?)
    } else {
        None
    };

    let result = driver.run();
    info!("scheduler finished: {:?}", result);

    if let Some(ref mut listening) = listening {
        if let Err(err) = listening.close() {
            warn!("could not close api: {}", err);
        }
    }
    result
}
