//! Writing tests: encode, then decode with `XlsxReader`.

mod roundtrip;
