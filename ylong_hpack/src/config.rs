// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Settings of an [`HPack`] codec.
//!
//! [`HPack`]: crate::HPack

const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;
const DEFAULT_MAX_HEADER_LIST_SIZE: usize = usize::MAX;

/// Settings which can be used to configure an HPACK codec.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HpackConfig;
///
/// let mut config = HpackConfig::new();
/// config.set_header_table_size(8192);
/// config.set_max_header_list_size(16 * 1024);
/// assert_eq!(config.header_table_size(), 8192);
/// assert!(!config.use_huffman_coding());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HpackConfig {
    header_table_size: usize,
    max_header_list_size: usize,
    use_huffman: bool,
}

impl HpackConfig {
    /// `HpackConfig` constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SETTINGS_HEADER_TABLE_SIZE, the upper bound of the decoding
    /// dynamic table.
    pub fn set_header_table_size(&mut self, size: usize) {
        self.header_table_size = size;
    }

    /// Sets the SETTINGS_MAX_HEADER_LIST_SIZE. Unlimited by default.
    pub fn set_max_header_list_size(&mut self, size: usize) {
        self.max_header_list_size = size;
    }

    /// Enables Huffman coding of the string literals written by the encoder.
    pub fn set_use_huffman_coding(&mut self, use_huffman: bool) {
        self.use_huffman = use_huffman;
    }

    /// Gets the SETTINGS_HEADER_TABLE_SIZE.
    pub fn header_table_size(&self) -> usize {
        self.header_table_size
    }

    /// Gets the SETTINGS_MAX_HEADER_LIST_SIZE.
    pub fn max_header_list_size(&self) -> usize {
        self.max_header_list_size
    }

    pub fn use_huffman_coding(&self) -> bool {
        self.use_huffman
    }
}

impl Default for HpackConfig {
    fn default() -> Self {
        Self {
            header_table_size: DEFAULT_HEADER_TABLE_SIZE,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
            use_huffman: false,
        }
    }
}

#[cfg(test)]
mod ut_hpack_config {
    use crate::config::HpackConfig;

    /// UT test cases for `HpackConfig`.
    ///
    /// # Brief
    /// 1. Creates a default `HpackConfig` and checks the defaults.
    /// 2. Calls every setter.
    /// 3. Checks the getters.
    #[test]
    fn ut_hpack_config() {
        let mut config = HpackConfig::new();
        assert_eq!(config.header_table_size(), 4096);
        assert_eq!(config.max_header_list_size(), usize::MAX);
        assert!(!config.use_huffman_coding());

        config.set_header_table_size(0);
        config.set_max_header_list_size(1024);
        config.set_use_huffman_coding(true);
        assert_eq!(config.header_table_size(), 0);
        assert_eq!(config.max_header_list_size(), 1024);
        assert!(config.use_huffman_coding());
    }
}
