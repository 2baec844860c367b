// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Writes random GIMP gradients for manual testing.

const SEGMENT_COUNTS: [usize; 3] = [1, 8, 64];

fn main() -> std::io::Result<()> {
    for segments in SEGMENT_COUNTS {
        let name = format!("random_{segments}");
        std::fs::write(format!("{name}.ggr"), bench_gen::ggr(&name, segments))?;
    }

    Ok(())
}
