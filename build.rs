// Build script for hdf5-wrap
//
// hdf5-sys publishes the detected library version as DEP_HDF5_VERSION_*
// variables. They are turned into cfgs here so link and object info calls
// can use the newest non-deprecated API the linked library provides.

use std::env;

const VERSION_CFGS: &[(&str, &str)] = &[
    ("DEP_HDF5_VERSION_1_10_3", "hdf5_1_10_3"),
    ("DEP_HDF5_VERSION_1_12_0", "hdf5_1_12"),
];

fn main() {
    for (var, cfg) in VERSION_CFGS {
        println!("cargo::rustc-check-cfg=cfg({cfg})");
        println!("cargo::rerun-if-env-changed={var}");
        if env::var_os(var).is_some() {
            println!("cargo::rustc-cfg={cfg}");
        }
    }
}
