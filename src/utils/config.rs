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

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::Read;
use std::time::Duration;

use clap::{App, Arg};
use yaml_rust::yaml::Yaml;
use yaml_rust::YamlLoader;

use crate::driver::DriverError;

const ENV_PREFIX: &str = "MESOS_";

lazy_static! {
    static ref DEFAULTS: HashMap<&'static str, &'static str> = {
        let mut defaults = HashMap::new();
        defaults.insert("master_detect_timeout", "10");
        defaults.insert("webui_port", "8081");
        defaults.insert("local_slaves", "1");
        defaults.insert("local_cpus", "1");
        defaults.insert("local_mem", "1024");
        defaults
    };
}

/// Options understood on the command line, with their help text.
const OPTIONS: &[(&str, &str)] = &[
    ("master", "Master URL: host:port, master@host:port, mesos://host:port or local"),
    ("conf", "Path to a YAML configuration file"),
    ("user", "User the framework registers as"),
    ("framework_name", "Name the framework registers with"),
    ("master_detect_timeout", "Seconds start() waits for a master to be detected"),
    ("webui_port", "Port of the diagnostic web view"),
    ("local_slaves", "Number of nodes simulated in local mode"),
    ("local_cpus", "CPUs per simulated node"),
    ("local_mem", "Memory (MB) per simulated node"),
];

/// Driver configuration: a flat string mapping with typed getters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Params {
        Params { values: HashMap::new() }
    }

    pub fn from_url(url: &str) -> Result<Params, DriverError> {
        let mut params = Params::new();
        params.set("master", url);
        params.load_overlays()?;
        Ok(params)
    }

    pub fn from_map(map: &HashMap<String, String>) -> Result<Params, DriverError> {
        let mut params = Params { values: map.clone() };
        params.load_overlays()?;
        Ok(params)
    }

    /// Parses command-line style arguments. The first argument is the
    /// program name and is never read as an option.
    pub fn from_args<I, T>(args: I) -> Result<Params, DriverError>
        where I: IntoIterator<Item = T>,
              T: Into<String>
    {
        let args: Vec<String> = args.into_iter().map(|arg| arg.into()).collect();

        let mut app = App::new("mesos-scheduler").arg(Arg::with_name("param")
            .short("p")
            .long("param")
            .help("Additional key=value option")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1));
        for &(name, help) in OPTIONS {
            app = app.arg(Arg::with_name(name).long(name).help(help).takes_value(true));
        }

        let matches = app.get_matches_from_safe(args).map_err(|err| DriverError::Config(err.message))?;

        let mut params = Params::new();
        if let Some(values) = matches.values_of("param") {
            for value in values {
                let mut parts = value.splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(key), Some(val)) if !key.is_empty() => params.set(key, val),
                    _ => return Err(DriverError::Config(format!("expected key=value, got '{}'", value))),
                }
            }
        }
        for &(name, _) in OPTIONS {
            if let Some(value) = matches.value_of(name) {
                params.set(name, value);
            }
        }

        params.load_overlays()?;
        Ok(params)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Explicit value, then the built-in default, then `default`.
    pub fn get(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => {
                DEFAULTS.get(key)
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| default.to_string())
            }
        }
    }

    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, DriverError> {
        self.parse(key, default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64, DriverError> {
        self.parse(key, default)
    }

    pub fn get_secs(&self, key: &str, default: u64) -> Result<Duration, DriverError> {
        self.parse(key, default).map(Duration::from_secs)
    }

    pub fn master(&self) -> Option<String> {
        self.values.get("master").cloned()
    }

    fn parse<T: std::str::FromStr + ToString>(&self, key: &str, default: T) -> Result<T, DriverError> {
        let raw = self.get(key, &default.to_string());
        raw.trim()
            .parse()
            .map_err(|_| DriverError::Config(format!("invalid value '{}' for {}", raw, key)))
    }

    fn load_overlays(&mut self) -> Result<(), DriverError> {
        self.load_env();
        if let Some(path) = self.values.get("conf").cloned() {
            self.load_conf_file(&path)?;
        }
        Ok(())
    }

    fn load_env(&mut self) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let name = key[ENV_PREFIX.len()..].to_lowercase();
                self.values.entry(name).or_insert(value);
            }
        }
    }

    fn load_conf_file(&mut self, path: &str) -> Result<(), DriverError> {
        let mut file = File::open(path).map_err(|err| DriverError::Config(format!("{}: {}", path, err)))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|err| DriverError::Config(format!("{}: {}", path, err)))?;
        self.load_yaml(&content)
    }

    fn load_yaml(&mut self, content: &str) -> Result<(), DriverError> {
        let docs = YamlLoader::load_from_str(content).map_err(|err| DriverError::Config(err.to_string()))?;
        let doc = match docs.into_iter().next() {
            Some(doc) => doc,
            None => return Ok(()),
        };

        match doc {
            Yaml::Hash(entries) => {
                for (key, value) in entries {
                    match (read_scalar(&key), read_scalar(&value)) {
                        (Some(key), Some(value)) => {
                            self.values.entry(key).or_insert(value);
                        }
                        _ => debug!("ignoring non-scalar config entry {:?}", key),
                    }
                }
                Ok(())
            }
            Yaml::Null => Ok(()),
            _ => Err(DriverError::Config("config file must be a mapping".to_string())),
        }
    }
}

fn read_scalar(element: &Yaml) -> Option<String> {
    match *element {
        Yaml::String(ref value) => Some(value.clone()),
        Yaml::Integer(value) => Some(value.to_string()),
        Yaml::Real(ref value) => Some(value.clone()),
        Yaml::Boolean(value) => Some(value.to_string()),
        _ => None,
    }
}
