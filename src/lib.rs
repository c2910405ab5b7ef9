pub mod fqconfig;
pub mod packetgen;

#[cfg(test)]
mod test;
