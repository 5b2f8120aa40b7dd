/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
use gl_generator::{Api, Fallbacks, GlobalGenerator, Profile, Registry};
use std::fs::File;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    // The game speaks OpenGL 1.x with the texture-environment combiner, which
    // became core in 1.3. 1.5 also brings the SRCn_* aliases.
    let mut file = File::create(out_dir.join("gl15.rs")).unwrap();
    Registry::new(
        Api::Gl,
        (1, 5),
        Profile::Compatibility,
        Fallbacks::None,
        [] as [&str; 0],
    )
    .write_bindings(GlobalGenerator, &mut file)
    .unwrap();
}
