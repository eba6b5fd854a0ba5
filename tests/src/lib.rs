#![cfg(test)]

mod scan {
    mod export;
    mod pipeline;
}
