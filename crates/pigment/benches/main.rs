// Copyright 2024 the Piet Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod convert;

use criterion::{criterion_group, criterion_main};

criterion_group!(c, composite::composite);
criterion_group!(cv, convert::convert);
criterion_group!(m, mix::mix);
criterion_main!(c, cv, m);
