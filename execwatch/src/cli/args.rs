//! CLI argument definitions

use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser)]
#[command(
    name = "execwatch",
    about = "Export eBPF exec-event counters as Prometheus metrics",
    after_help = "\
EXAMPLES:
    sudo execwatch                           Serve metrics on 0.0.0.0:9110
    sudo execwatch --listen 127.0.0.1:9200   Custom scrape address
    curl http://localhost:9110/metrics       Scrape by hand"
)]
pub struct Args {
    /// Address for the Prometheus scrape endpoint
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:9110")]
    pub listen: SocketAddr,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listen_address() {
        let args = Args::try_parse_from(["execwatch"]).expect("defaults should parse");
        assert_eq!(args.listen, "0.0.0.0:9110".parse::<SocketAddr>().unwrap());
        assert!(!args.quiet);
    }

    #[test]
    fn test_custom_listen_address() {
        let args = Args::try_parse_from(["execwatch", "--listen", "127.0.0.1:9200"])
            .expect("valid address should parse");
        assert_eq!(args.listen.port(), 9200);
    }

    #[test]
    fn test_rejects_malformed_listen_address() {
        assert!(Args::try_parse_from(["execwatch", "--listen", "not-an-addr"]).is_err());
    }
}
