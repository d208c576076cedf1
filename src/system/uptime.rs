use super::error::SampleError;
use super::source::CounterSource;
use crate::format::format_uptime;

/// Time since boot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uptime {
    pub seconds: f64,
}

impl Uptime {
    pub fn formatted(&self) -> String {
        format_uptime(self.seconds)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

pub struct UptimeSampler<'a> {
    source: &'a dyn CounterSource,
}

impl<'a> UptimeSampler<'a> {
    pub fn new(source: &'a dyn CounterSource) -> Self {
        UptimeSampler { source }
    }

    pub fn sample(&self) -> Result<Uptime, SampleError> {
        let text = self
            .source
            .uptime()
            .map_err(|err| SampleError::unavailable("uptime", err))?;
        let raw = text
            .split_whitespace()
            .next()
            .ok_or_else(|| SampleError::invalid_data("uptime", "empty record"))?;
        let seconds = raw
            .parse::<f64>()
            .map_err(|_| SampleError::invalid_data("uptime", format!("non-numeric {raw:?}")))?;
        Ok(Uptime { seconds })
    }

    pub fn load_average(&self) -> Result<LoadAverage, SampleError> {
        let text = self
            .source
            .loadavg()
            .map_err(|err| SampleError::unavailable("loadavg", err))?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(SampleError::invalid_data(
                "loadavg",
                format!("expected 3 averages, found {}", fields.len()),
            ));
        }
        let parse = |raw: &str| {
            raw.parse::<f64>()
                .map_err(|_| SampleError::invalid_data("loadavg", format!("non-numeric {raw:?}")))
        };
        Ok(LoadAverage {
            one: parse(fields[0])?,
            five: parse(fields[1])?,
            fifteen: parse(fields[2])?,
        })
    }
}
