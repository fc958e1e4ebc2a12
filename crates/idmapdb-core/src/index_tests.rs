//! Tests for the ID-stable index

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::index::IdMapIndex;
    use crate::SENTINEL_ID;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::tempdir;

    const DIMENSION: usize = 32;

    fn random_vectors(n: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..DIMENSION).map(|_| rng.gen::<f32>()).collect())
            .collect()
    }

    fn populated_index(dir: &std::path::Path, n: usize) -> (IdMapIndex, Vec<Vec<f32>>) {
        let mut index = IdMapIndex::open(dir.join("test.index"), DIMENSION).unwrap();
        let vectors = random_vectors(n, 7);
        index.insert_many(&vectors).unwrap();
        (index, vectors)
    }

    #[test]
    fn test_fresh_index_is_empty() {
        // Arrange & Act
        let dir = tempdir().unwrap();
        let index = IdMapIndex::open(dir.path().join("test.index"), DIMENSION).unwrap();

        // Assert
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
        assert_eq!(index.dimension(), DIMENSION);
    }

    #[test]
    fn test_insert_one_assigns_sequential_ids() {
        // Arrange
        let dir = tempdir().unwrap();
        let mut index = IdMapIndex::open(dir.path().join("test.index"), DIMENSION).unwrap();
        let vectors = random_vectors(3, 1);

        // Act & Assert
        assert_eq!(index.insert_one(&vectors[0]).unwrap(), 0);
        assert_eq!(index.insert_one(&vectors[1]).unwrap(), 1);
        assert_eq!(index.insert_one(&vectors[2]).unwrap(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_insert_one_self_match_at_distance_zero() {
        // Arrange
        let dir = tempdir().unwrap();
        let mut index = IdMapIndex::open(dir.path().join("test.index"), DIMENSION).unwrap();
        let vector = random_vectors(1, 2).pop().unwrap();

        // Act
        let id = index.insert_one(&vector).unwrap();
        let (ids, distances) = index.find_one(&vector, 1).unwrap();

        // Assert
        assert_eq!(ids, vec![id]);
        assert_eq!(distances, vec![0.0]);
    }

    #[test]
    fn test_insert_many_returns_contiguous_block() {
        // Arrange
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 4);

        // Act - second batch starts where the first ended
        let ids = index.insert_many(&random_vectors(6, 3)).unwrap();

        // Assert
        assert_eq!(ids, vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(index.len(), 10);
    }

    #[test]
    fn test_insert_dimension_mismatch() {
        // Arrange
        let dir = tempdir().unwrap();
        let mut index = IdMapIndex::open(dir.path().join("test.index"), DIMENSION).unwrap();

        // Act
        let err = index.insert_one(&vec![0.5; DIMENSION - 1]).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: DIMENSION,
                actual: 31
            }
        ));
    }

    #[test]
    fn test_find_one_returns_known_neighbor() {
        // Arrange
        let dir = tempdir().unwrap();
        let (index, vectors) = populated_index(dir.path(), 100);

        // Act
        let (ids, distances) = index.find_one(&vectors[3], 10).unwrap();

        // Assert
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], 3);
        assert_eq!(distances[0], 0.0);
    }

    #[test]
    fn test_find_one_sentinel_padding_passes_through() {
        // Arrange
        let dir = tempdir().unwrap();
        let (index, vectors) = populated_index(dir.path(), 2);

        // Act
        let (ids, _) = index.find_one(&vectors[0], 10).unwrap();

        // Assert
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[2..], [SENTINEL_ID; 8]);
    }

    #[test]
    fn test_find_many_independent_rows() {
        // Arrange
        let dir = tempdir().unwrap();
        let (index, vectors) = populated_index(dir.path(), 100);

        // Act
        let (ids, distances) = index.find_many(&vectors[..4], 10).unwrap();

        // Assert
        assert_eq!(ids.len(), 4);
        for (row, (row_ids, row_distances)) in ids.iter().zip(&distances).enumerate() {
            assert_eq!(row_ids[0], row as i64);
            assert_eq!(row_distances[0], 0.0);
        }
    }

    #[test]
    fn test_update_one_repoints_id() {
        // Arrange
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 100);
        let new_vector = random_vectors(1, 11).pop().unwrap();

        // Act
        let returned = index.update_one(&new_vector, 15).unwrap();
        let (ids, distances) = index.find_one(&new_vector, 1).unwrap();

        // Assert
        assert_eq!(returned, 15);
        assert_eq!(ids, vec![15]);
        assert_eq!(distances, vec![0.0]);
        assert_eq!(index.len(), 100);
    }

    #[test]
    fn test_update_one_absent_id_inserts() {
        // Arrange - removal of a missing ID is a no-op, so the add lands
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 10);
        let new_vector = random_vectors(1, 12).pop().unwrap();

        // Act
        index.update_one(&new_vector, 500).unwrap();

        // Assert
        assert_eq!(index.len(), 11);
        let (ids, _) = index.find_one(&new_vector, 1).unwrap();
        assert_eq!(ids, vec![500]);
    }

    #[test]
    fn test_update_many_repoints_target_ids() {
        // Arrange
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 100);
        let new_vectors = random_vectors(5, 13);
        let targets: Vec<i64> = (3..8).collect();

        // Act
        let returned = index.update_many(&new_vectors, &targets).unwrap();
        let (ids, distances) = index.find_many(&new_vectors, 10).unwrap();

        // Assert
        assert_eq!(returned, targets);
        assert_eq!(index.len(), 100);
        for (row, (row_ids, row_distances)) in ids.iter().zip(&distances).enumerate() {
            assert_eq!(row_ids[0], 3 + row as i64);
            assert_eq!(row_distances[0], 0.0);
        }
    }

    #[test]
    fn test_update_many_length_mismatch() {
        // Arrange
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 10);

        // Act
        let err = index
            .update_many(&random_vectors(5, 14), &[1, 2, 3])
            .unwrap_err();

        // Assert
        assert!(matches!(
            err,
            Error::LengthMismatch { vectors: 5, ids: 3 }
        ));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        // Arrange
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.index");
        let (index, vectors) = populated_index(dir.path(), 50);

        // Act
        index.save().unwrap();
        let reloaded = IdMapIndex::open(&path, DIMENSION).unwrap();

        // Assert - same size, same search results
        assert_eq!(reloaded.len(), index.len());
        let (ids, distances) = reloaded.find_one(&vectors[17], 1).unwrap();
        assert_eq!(ids, vec![17]);
        assert_eq!(distances, vec![0.0]);
    }

    #[test]
    fn test_persist_creates_parent_directories() {
        // Arrange
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("test.index");
        let (index, _) = populated_index(dir.path(), 5);

        // Act
        index.persist(&nested).unwrap();

        // Assert
        assert!(nested.is_file());
        assert_eq!(IdMapIndex::open(&nested, DIMENSION).unwrap().len(), 5);
    }

    #[test]
    fn test_loaded_dimension_wins_over_requested() {
        // Arrange - snapshot written at dimension 32
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.index");
        let (index, _) = populated_index(dir.path(), 5);
        index.save().unwrap();

        // Act - caller asks for a different dimension
        let reloaded = IdMapIndex::open(&path, 64).unwrap();

        // Assert
        assert_eq!(reloaded.dimension(), DIMENSION);
    }

    #[test]
    fn test_ids_are_monotonic_across_updates() {
        // Arrange - updates free and reuse their own IDs, never lowering
        // the count, so fresh inserts keep climbing
        let dir = tempdir().unwrap();
        let (mut index, _) = populated_index(dir.path(), 10);

        // Act
        index
            .update_many(&random_vectors(3, 15), &[0, 1, 2])
            .unwrap();
        let next = index.insert_one(&random_vectors(1, 16)[0]).unwrap();

        // Assert
        assert_eq!(next, 10);
    }
}
