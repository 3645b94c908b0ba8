//! Lists the search strategies and the endpoints that serve them.

use std::io::{self, Write};

use waymap_lib::{ClientConfig, SearchStrategy};

pub fn write_strategies<W: Write>(out: &mut W, config: &ClientConfig) -> io::Result<()> {
    for strategy in SearchStrategy::ALL {
        writeln!(
            out,
            "{:<18} {}",
            strategy.as_str(),
            config.endpoint_url(strategy.endpoint())
        )?;
    }
    Ok(())
}
