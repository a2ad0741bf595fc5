//! `nextpaste ips`.

use nextpaste_runtime::local_ips;

pub fn execute() {
    let ips = local_ips();
    if ips.is_empty() {
        println!("No network addresses found.");
        return;
    }
    for ip in ips {
        println!("{ip}");
    }
}
