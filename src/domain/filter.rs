use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

/// 大小比较方式及阈值（字节）
///
/// 阈值允许为负数，此时按数值比较：任何大小都大于它。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeFilter {
    Less(i64),
    Equal(i64),
    Greater(i64),
}

impl SizeFilter {
    /// 检查文件大小是否满足比较条件
    pub fn matches(&self, size: u64) -> bool {
        let size = i128::from(size);
        match *self {
            SizeFilter::Less(threshold) => size < i128::from(threshold),
            SizeFilter::Equal(threshold) => size == i128::from(threshold),
            SizeFilter::Greater(threshold) => size > i128::from(threshold),
        }
    }
}

/// 判定所需的文件元数据（不跟随符号链接获取）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub inode: u64,
    pub links: u64,
    pub size: u64,
}

impl From<&Metadata> for FileStat {
    fn from(metadata: &Metadata) -> Self {
        Self {
            inode: metadata.ino(),
            links: metadata.nlink(),
            size: metadata.size(),
        }
    }
}

/// 文件筛选条件
///
/// 每个条件都是可选的，`None` 表示不做限制。所有启用的条件之间是“与”关系。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub inode: Option<i64>,
    pub links: Option<i64>,
    pub name: Option<OsString>,
    pub size: Option<SizeFilter>,
}

impl FileFilter {
    /// 是否没有任何启用的条件
    pub fn is_empty(&self) -> bool {
        self.inode.is_none() && self.links.is_none() && self.name.is_none() && self.size.is_none()
    }

    /// 负数的 inode 号不可能存在，永远不匹配
    pub fn matches_inode(&self, inode: u64) -> bool {
        self.inode.map_or(true, |wanted| u64::try_from(wanted) == Ok(inode))
    }

    pub fn matches_links(&self, links: u64) -> bool {
        self.links.map_or(true, |wanted| u64::try_from(wanted) == Ok(links))
    }

    /// 文件名必须完全相等，不做子串或通配符匹配
    pub fn matches_name(&self, name: &OsStr) -> bool {
        self.name.as_deref().map_or(true, |wanted| name == wanted)
    }

    pub fn matches_size(&self, size: u64) -> bool {
        self.size.map_or(true, |filter| filter.matches(size))
    }

    /// 检查非目录条目是否满足全部启用的条件
    pub fn should_include(&self, stat: &FileStat, name: &OsStr) -> bool {
        self.matches_inode(stat.inode)
            && self.matches_links(stat.links)
            && self.matches_name(name)
            && self.matches_size(stat.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(inode: u64, links: u64, size: u64) -> FileStat {
        FileStat { inode, links, size }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = FileFilter::default();
        assert!(filter.is_empty());
        assert!(filter.should_include(&stat(1, 1, 0), OsStr::new("a")));
        assert!(filter.should_include(&stat(99, 7, 1 << 40), OsStr::new("b.txt")));
    }

    #[test]
    fn test_size_boundaries() {
        let less = SizeFilter::Less(50);
        assert!(less.matches(49));
        assert!(!less.matches(50));
        assert!(!less.matches(51));

        let equal = SizeFilter::Equal(50);
        assert!(!equal.matches(49));
        assert!(equal.matches(50));
        assert!(!equal.matches(51));

        let greater = SizeFilter::Greater(50);
        assert!(!greater.matches(49));
        assert!(!greater.matches(50));
        assert!(greater.matches(51));

        assert!(SizeFilter::Equal(0).matches(0));
        assert!(!SizeFilter::Less(0).matches(0));
    }

    #[test]
    fn test_negative_thresholds() {
        assert!(!SizeFilter::Less(-5).matches(0));
        assert!(!SizeFilter::Equal(-5).matches(0));
        assert!(SizeFilter::Greater(-5).matches(0));
        assert!(!SizeFilter::Less(i64::MAX).matches(u64::MAX));

        let filter = FileFilter {
            inode: Some(-1),
            ..Default::default()
        };
        assert!(!filter.should_include(&stat(u64::MAX, 1, 0), OsStr::new("x")));

        let filter = FileFilter {
            links: Some(-1),
            ..Default::default()
        };
        assert!(!filter.should_include(&stat(1, u64::MAX, 0), OsStr::new("x")));
    }

    #[test]
    fn test_name_is_exact() {
        let filter = FileFilter {
            name: Some(OsString::from("b.txt")),
            ..Default::default()
        };
        let any = stat(1, 1, 1);

        assert!(filter.should_include(&any, OsStr::new("b.txt")));
        assert!(!filter.should_include(&any, OsStr::new("b.tx")));
        assert!(!filter.should_include(&any, OsStr::new("ab.txt")));
        assert!(!filter.should_include(&any, OsStr::new("B.TXT")));
    }

    #[test]
    fn test_inode_and_links_exact() {
        let filter = FileFilter {
            inode: Some(42),
            links: Some(2),
            ..Default::default()
        };

        assert!(filter.should_include(&stat(42, 2, 0), OsStr::new("x")));
        assert!(!filter.should_include(&stat(43, 2, 0), OsStr::new("x")));
        assert!(!filter.should_include(&stat(42, 1, 0), OsStr::new("x")));
    }

    #[test]
    fn test_filters_are_anded() {
        let filter = FileFilter {
            name: Some(OsString::from("a.txt")),
            size: Some(SizeFilter::Greater(50)),
            ..Default::default()
        };

        assert!(filter.should_include(&stat(1, 1, 80), OsStr::new("a.txt")));
        // 名称匹配但大小不满足
        assert!(!filter.should_include(&stat(1, 1, 20), OsStr::new("a.txt")));
        // 大小满足但名称不匹配
        assert!(!filter.should_include(&stat(1, 1, 80), OsStr::new("b.txt")));
    }

    #[test]
    fn test_file_stat_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, vec![0u8; 80]).unwrap();

        let metadata = std::fs::symlink_metadata(&path).unwrap();
        let stat = FileStat::from(&metadata);

        assert_eq!(stat.size, 80);
        assert_eq!(stat.links, 1);
        assert_eq!(stat.inode, metadata.ino());
    }
}
