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

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::process;

use clap::{App, Arg, ArgMatches};
use mesos_sched_driver::driver::{DriverError, DriverState};
use mesos_sched_driver::scheduler::run_scheduler;
use mesos_sched_driver::utils::Params;

fn app() -> App<'static, 'static> {
    App::new("Mesos Local Framework")
        .about("Runs a batch of tasks through the scheduler driver")
        .version(crate_version!())
        .arg(Arg::with_name("MASTER")
            .short("m")
            .long("master")
            .help("Master URL: host:port, master@host:port, mesos://host:port or local [default: local]")
            .takes_value(true))
        .arg(Arg::with_name("TASKS")
            .short("t")
            .long("tasks")
            .help("Number of tasks to run")
            .default_value("3")
            .takes_value(true))
        .arg(Arg::with_name("WEBUI_PORT")
            .short("w")
            .long("webui-port")
            .help("Serve the driver state on this port")
            .takes_value(true))
        .arg(Arg::with_name("CONFIG")
            .short("c")
            .long("config")
            .help("Path to configuration file")
            .takes_value(true))
}

/// Only flags the user gave become explicit values, so `MESOS_MASTER` and a
/// `master` entry in the config file still apply. `local` is the last resort.
fn driver_params(matches: &ArgMatches) -> Result<Params, DriverError> {
    let mut args = vec!["mesos-local-framework".to_string()];
    if let Some(master) = matches.value_of("MASTER") {
        args.push("--master".to_string());
        args.push(master.to_string());
    }
    if let Some(port) = matches.value_of("WEBUI_PORT") {
        args.push("--webui_port".to_string());
        args.push(port.to_string());
    }
    if let Some(config) = matches.value_of("CONFIG") {
        args.push("--conf".to_string());
        args.push(config.to_string());
    }

    let mut params = Params::from_args(args)?;
    if !params.contains("master") {
        params.set("master", "local");
    }
    Ok(params)
}

fn main() {
    env_logger::init();

    let matches = app().get_matches();
    let tasks = value_t!(matches, "TASKS", usize).unwrap_or_else(|err| err.exit());

    let params = match driver_params(&matches) {
        Ok(params) => params,
        Err(err) => {
            error!("invalid configuration: {}", err);
            process::exit(2);
        }
    };

    info!("connecting to master at {}", params.master().unwrap_or_default());

    match run_scheduler(params, tasks) {
        Ok(state) => {
            info!("driver ended {}", state.name());
            process::exit(if state == DriverState::Stopped { 0 } else { 1 });
        }
        Err(err) => {
            error!("driver failed ({}): {}", err.code(), err);
            process::exit(1);
        }
    }
}
