//! 组合层测试

mod fixtures;
