use ethers::prelude::Abigen;
use std::{env, path::Path};

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();

    println!("cargo:rerun-if-changed=abi");

    // gen types for FundMe.sol

    let abi_source = "./abi/FundMe.json";
    let out_file = Path::new(&out_dir).join("fund_me_contract.rs");
    if out_file.exists() {
        std::fs::remove_file(&out_file).unwrap();
    }

    Abigen::new("FundMe", abi_source)
        .unwrap()
        .generate()
        .unwrap()
        .write_to_file(out_file)
        .unwrap();

    // gen types for the chainlink MockV3Aggregator

    let abi_source = "./abi/MockV3Aggregator.json";
    let out_file = Path::new(&out_dir).join("mock_v3_aggregator_contract.rs");
    if out_file.exists() {
        std::fs::remove_file(&out_file).unwrap();
    }

    Abigen::new("MockV3Aggregator", abi_source)
        .unwrap()
        .generate()
        .unwrap()
        .write_to_file(out_file)
        .unwrap();
}
