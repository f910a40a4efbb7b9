pub mod node;

#[cfg(test)]
pub mod mock_node;
