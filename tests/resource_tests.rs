use scanray::error::RenderError;
use scanray::resource::Resource;

#[cfg(test)]
mod resource_contract_tests {
    use super::*;

    #[test]
    fn test_linear_construction() {
        let res: Resource<f32> = Resource::new(64);
        assert_eq!(res.count(), 64);
        assert_eq!(res.size_bytes(), 64 * 4);
        assert_eq!(res.stride(), 0, "linear resources have no row stride");
    }

    #[test]
    fn test_2d_construction() {
        let res: Resource<u8> = Resource::new_2d(8, 4);
        assert_eq!(res.count(), 32);
        assert_eq!(res.width(), 8);
        assert_eq!(res.height(), 4);
        assert_eq!(res.stride(), 8);
    }

    #[test]
    fn test_item_round_trip() {
        let mut res: Resource<u32> = Resource::new(4);
        *res.item_mut(3).unwrap() = 99;
        assert_eq!(*res.item(3).unwrap(), 99);
    }

    #[test]
    fn test_2d_addressing_matches_linear() {
        let mut res: Resource<u32> = Resource::new_2d(5, 3);
        *res.item_2d_mut(4, 2).unwrap() = 7;
        assert_eq!(*res.item(2 * 5 + 4).unwrap(), 7);
    }

    #[test]
    fn test_linear_out_of_range() {
        let res: Resource<f32> = Resource::new(10);
        match res.item(10) {
            Err(RenderError::OutOfRange { index, count }) => {
                assert_eq!(index, 10);
                assert_eq!(count, 10);
            }
            other => panic!("expected OutOfRange, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_2d_x_must_stay_inside_stride() {
        let res: Resource<f32> = Resource::new_2d(4, 4);
        assert!(res.item_2d(3, 3).is_ok());
        // x beyond the stride must not wrap into the next row.
        assert!(res.item_2d(4, 0).is_err());
        assert!(res.item_2d(0, 4).is_err());
    }

    #[test]
    fn test_2d_access_on_linear_resource_fails() {
        let res: Resource<f32> = Resource::new(16);
        assert!(res.item_2d(0, 0).is_err());
    }

    #[test]
    fn test_fill_overwrites_every_element() {
        let mut res: Resource<u8> = Resource::new_2d(3, 3);
        res.fill(42);
        assert!(res.data().iter().all(|&v| v == 42));
    }

    #[test]
    fn test_from_vec_keeps_data() {
        let res = Resource::from_vec(vec![1u32, 2, 3]);
        assert_eq!(res.count(), 3);
        assert_eq!(res.data(), &[1, 2, 3]);
    }
}
